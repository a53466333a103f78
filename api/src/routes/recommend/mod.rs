pub mod recommend_request;
pub mod recommend_route;
