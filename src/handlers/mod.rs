// Route handlers, grouped by resource.
//
// /user/*      public - registration, logins, token refresh
// /languages/* protected - bearer token required on every route

pub mod languages;
pub mod user;
