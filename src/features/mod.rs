//! Domain features (auth, organizations, team members, kudos). Each wraps the
//! shared `HttpClient` so front-ends stay free of endpoint and payload details.

pub mod auth;
pub mod kudos;
pub mod orgs;
pub mod users;
