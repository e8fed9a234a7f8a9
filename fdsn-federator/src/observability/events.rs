//! Canonical structured event names used across `fdsn-federator`.

// Route table construction events.
pub const ROUTE_INSERTED: &str = "route_inserted";
pub const ROUTE_OVERLAP_REJECTED: &str = "route_overlap_rejected";
pub const ROUTE_OVERLAP_ACCEPTED: &str = "route_overlap_accepted";
pub const ROUTE_TABLE_BUILT: &str = "route_table_built";
pub const VIRTUAL_NETWORK_TABLE_BUILT: &str = "virtual_network_table_built";

// Directory snapshot events.
pub const ROUTING_SNAPSHOT_PUBLISHED: &str = "routing_snapshot_published";

// Resolution events.
pub const RESOLVE_START: &str = "resolve_start";
pub const RESOLVE_OK: &str = "resolve_ok";
pub const RESOLVE_NO_ROUTE: &str = "resolve_no_route";
pub const VIRTUAL_NETWORK_EXPANDED: &str = "virtual_network_expanded";
pub const ROUTE_SHADOWED_PARTIALLY: &str = "route_shadowed_partially";

// Query adapter events.
pub const QUERY_REJECTED: &str = "query_rejected";
pub const QUERY_NO_CONTENT: &str = "query_no_content";

// Upstream fetch events.
pub const UPSTREAM_CONNECT: &str = "upstream_connect";
pub const UPSTREAM_BLOCK: &str = "upstream_block";
pub const UPSTREAM_COMPLETE: &str = "upstream_complete";
pub const UPSTREAM_FAILED: &str = "upstream_failed";
pub const UPSTREAM_PARTIAL_BLOCK_DROPPED: &str = "upstream_partial_block_dropped";
pub const ACCOUNTING_FAILED: &str = "accounting_failed";
