pub mod share_route;
