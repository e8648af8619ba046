pub mod http_lookup;
pub mod roster_lookup;
