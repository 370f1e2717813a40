//! Request middleware. Only access logging is needed: the service is
//! unauthenticated and stateless per request.

pub mod access;
