/// Router Module Index
///
/// Splits the routes by what they require from the caller. Session routes sit
/// behind the `SessionContext` extractor layer in `create_router`.

/// Routes reachable without a session token.
pub mod public;

/// Routes that resume a session and run a render cycle on it.
pub mod session;
