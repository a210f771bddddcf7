use async_trait::async_trait;
use dashboard_portal::{
    access::{PageId, Role, RoleAccessTable},
    error::{LoadError, PageRenderError, RegistryError},
    identity::MockIdentityProvider,
    models::{LoginFailureKind, View},
    navigation::{Action, Navigator},
    registry::{DashboardPage, PageContent, PageRegistry, RenderHandler},
    session::Session,
};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

// --- Test Handlers ---

struct FailingPage;

#[async_trait]
impl RenderHandler for FailingPage {
    async fn render(&self) -> Result<PageContent, PageRenderError> {
        Err(PageRenderError::Failed("warehouse offline".to_string()))
    }
}

struct PanickingPage;

#[async_trait]
impl RenderHandler for PanickingPage {
    async fn render(&self) -> Result<PageContent, PageRenderError> {
        panic!("handler bug");
    }
}

#[derive(Default)]
struct CountingPage {
    calls: AtomicUsize,
}

#[async_trait]
impl RenderHandler for CountingPage {
    async fn render(&self) -> Result<PageContent, PageRenderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(PageContent {
            title: "Counted".to_string(),
            embed_url: None,
        })
    }
}

// --- Test Utilities ---

fn identities() -> MockIdentityProvider {
    MockIdentityProvider::new()
        .with_user("vendedor@loja.com", "s3nha", Some("vendedor"))
        .with_user("diretor@loja.com", "s3nha", Some("diretor"))
        .with_user("semperfil@loja.com", "s3nha", None)
}

fn standard_registry() -> PageRegistry {
    PageRegistry::builder()
        .page("Dashboard", "Dashboard", DashboardPage::new("Dashboard", None))
        .page(
            "Venda",
            "Vendas",
            DashboardPage::new("Dashboard - Vendedor", Some("https://bi.example.com/venda".to_string())),
        )
        .page("Carros", "Carros", DashboardPage::new("Dashboard - Carros", None))
        .page("Gsv", "Pós-venda", FailingPage)
        .page("Adm", "Adm", PanickingPage)
        .build()
        .unwrap()
}

fn navigator_with(pages: Result<PageRegistry, LoadError>) -> Navigator {
    let ids = Arc::new(identities());
    Navigator::new(Arc::new(RoleAccessTable::standard()), pages, ids.clone(), ids)
}

fn navigator() -> Navigator {
    navigator_with(Ok(standard_registry()))
}

async fn login(nav: &Navigator, email: &str) -> Session {
    let mut session = Session::new();
    let rendered = nav
        .cycle(
            &mut session,
            Action::SubmitCredentials {
                principal: email.to_string(),
                secret: "s3nha".to_string(),
            },
        )
        .await;
    assert!(!matches!(rendered.view, View::Login { .. }), "login failed: {:?}", rendered.view);
    session
}

// --- Tests ---

#[tokio::test]
async fn test_logged_out_always_renders_login() {
    let nav = navigator();
    let mut session = Session::new();

    let rendered = nav.cycle(&mut session, Action::Show).await;
    assert_eq!(rendered.view, View::Login { error: None });
    assert!(rendered.menu.is_empty());
    assert_eq!(rendered.principal, None);

    let rendered = nav
        .cycle(&mut session, Action::Navigate(PageId::from("Venda")))
        .await;
    assert_eq!(rendered.view, View::Login { error: None });
    assert_eq!(session, Session::new());
}

#[tokio::test]
async fn test_login_lands_on_dashboard() {
    let nav = navigator();
    let session = login(&nav, "vendedor@loja.com").await;

    let rendered = nav.render(&session).await;
    assert_eq!(rendered.principal.as_deref(), Some("vendedor@loja.com"));
    assert_eq!(rendered.role, Some(Role::from("vendedor")));
    match rendered.view {
        View::Page { page, content, .. } => {
            assert_eq!(page.as_str(), "Dashboard");
            assert_eq!(content.title, "Dashboard");
        }
        other => panic!("expected dashboard page, got {:?}", other),
    }
}

#[tokio::test]
async fn test_menu_lists_accessible_pages_in_registry_order() {
    let nav = navigator();
    let mut session = login(&nav, "vendedor@loja.com").await;

    let rendered = nav
        .cycle(&mut session, Action::Navigate(PageId::from("Venda")))
        .await;
    let menu: Vec<(&str, &str, bool)> = rendered
        .menu
        .iter()
        .map(|item| (item.id.as_str(), item.label.as_str(), item.active))
        .collect();
    assert_eq!(menu, vec![("Dashboard", "Dashboard", false), ("Venda", "Vendas", true)]);

    match rendered.view {
        View::Page { label, content, .. } => {
            assert_eq!(label, "Vendas");
            assert_eq!(content.embed_url.as_deref(), Some("https://bi.example.com/venda"));
        }
        other => panic!("expected venda page, got {:?}", other),
    }
}

#[tokio::test]
async fn test_registered_but_forbidden_page_is_denied() {
    let nav = navigator();
    let mut session = login(&nav, "vendedor@loja.com").await;

    let rendered = nav
        .cycle(&mut session, Action::Navigate(PageId::from("Carros")))
        .await;
    assert_eq!(
        rendered.view,
        View::AccessDenied {
            page: PageId::from("Carros")
        }
    );
    assert_eq!(rendered.selected_page.as_str(), "Carros");
    // The menu is unaffected by the denial.
    assert_eq!(rendered.menu.len(), 2);
    assert!(rendered.menu.iter().all(|item| !item.active));
}

#[tokio::test]
async fn test_unregistered_page_renders_welcome() {
    let nav = navigator();
    let mut session = login(&nav, "vendedor@loja.com").await;

    let rendered = nav
        .cycle(&mut session, Action::Navigate(PageId::from("Relatorios")))
        .await;
    assert_eq!(rendered.view, View::Welcome);
}

#[tokio::test]
async fn test_failing_page_is_scoped() {
    let nav = navigator();
    let mut session = login(&nav, "diretor@loja.com").await;

    let rendered = nav
        .cycle(&mut session, Action::Navigate(PageId::from("Gsv")))
        .await;
    match &rendered.view {
        View::PageError { page, message } => {
            assert_eq!(page.as_str(), "Gsv");
            assert!(message.contains("Pós-venda"));
        }
        other => panic!("expected page error, got {:?}", other),
    }
    // Every page the role may open is still listed.
    assert_eq!(rendered.menu.len(), 5);
    assert!(session.is_authenticated());

    // Next cycle on another page is unaffected.
    let rendered = nav
        .cycle(&mut session, Action::Navigate(PageId::from("Carros")))
        .await;
    assert!(matches!(rendered.view, View::Page { .. }));
}

#[tokio::test]
async fn test_panicking_page_is_scoped() {
    let nav = navigator();
    let mut session = login(&nav, "diretor@loja.com").await;

    let rendered = nav
        .cycle(&mut session, Action::Navigate(PageId::from("Adm")))
        .await;
    assert!(matches!(rendered.view, View::PageError { ref page, .. } if page.as_str() == "Adm"));

    let rendered = nav.cycle(&mut session, Action::Navigate(PageId::from("Venda"))).await;
    assert!(matches!(rendered.view, View::Page { .. }));
}

#[tokio::test]
async fn test_denied_page_handler_is_never_called() {
    let counter = Arc::new(CountingPage::default());
    let registry = PageRegistry::builder()
        .page("Dashboard", "Dashboard", DashboardPage::new("Dashboard", None))
        .page_ref("Adm", "Adm", counter.clone())
        .build()
        .unwrap();
    let nav = navigator_with(Ok(registry));

    let mut vendedor = login(&nav, "vendedor@loja.com").await;
    let rendered = nav.cycle(&mut vendedor, Action::Navigate(PageId::from("Adm"))).await;
    assert!(matches!(rendered.view, View::AccessDenied { .. }));
    assert_eq!(counter.calls.load(Ordering::SeqCst), 0);

    let mut diretor = login(&nav, "diretor@loja.com").await;
    let rendered = nav.cycle(&mut diretor, Action::Navigate(PageId::from("Adm"))).await;
    assert!(matches!(rendered.view, View::Page { .. }));
    assert_eq!(counter.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_login_failures_render_login_with_kind() {
    let nav = navigator();
    let mut session = Session::new();

    let rendered = nav
        .cycle(
            &mut session,
            Action::SubmitCredentials {
                principal: "vendedor@loja.com".to_string(),
                secret: "errada".to_string(),
            },
        )
        .await;
    match rendered.view {
        View::Login { error: Some(failure) } => {
            assert_eq!(failure.kind, LoginFailureKind::InvalidCredentials)
        }
        other => panic!("expected login view, got {:?}", other),
    }

    let rendered = nav
        .cycle(
            &mut session,
            Action::SubmitCredentials {
                principal: "semperfil@loja.com".to_string(),
                secret: "s3nha".to_string(),
            },
        )
        .await;
    match rendered.view {
        View::Login { error: Some(failure) } => {
            assert_eq!(failure.kind, LoginFailureKind::RoleResolution)
        }
        other => panic!("expected login view, got {:?}", other),
    }
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn test_logout_returns_to_login() {
    let nav = navigator();
    let mut session = login(&nav, "diretor@loja.com").await;
    nav.cycle(&mut session, Action::Navigate(PageId::from("Carros"))).await;

    let rendered = nav.cycle(&mut session, Action::Logout).await;
    assert_eq!(rendered.view, View::Login { error: None });
    assert_eq!(rendered.selected_page, PageId::landing());
    assert_eq!(session, Session::new());
}

#[tokio::test]
async fn test_sessions_are_independent() {
    let nav = navigator();
    let mut vendedor = login(&nav, "vendedor@loja.com").await;
    let mut diretor = login(&nav, "diretor@loja.com").await;

    nav.cycle(&mut diretor, Action::Navigate(PageId::from("Carros"))).await;
    nav.cycle(&mut vendedor, Action::Logout).await;

    assert_eq!(diretor.selected_page().as_str(), "Carros");
    assert!(diretor.is_authenticated());
    assert!(!vendedor.is_authenticated());
}

#[tokio::test]
async fn test_unavailable_registry_renders_error_state() {
    let nav = navigator_with(Err(LoadError::Registry(RegistryError::EmptyId)));
    assert!(nav.registry().is_none());

    // Login still works; the pages are what is missing.
    let session = login(&nav, "diretor@loja.com").await;
    let rendered = nav.render(&session).await;
    assert!(matches!(rendered.view, View::Unavailable { .. }));
    assert!(rendered.menu.is_empty());
}
