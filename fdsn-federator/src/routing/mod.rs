//! Routing-resolution layer.
//!
//! Turns a query identifier, time window and service name into the ordered list of
//! upstream fetches that jointly cover it: glob matching over identifier fields,
//! interval arithmetic over time windows, priority arbitration across competing
//! routes and the per-stream identifier expansion some upstreams need.
//!
//! ```
//! use fdsn_federator::control_plane::route_table::{OverlapPolicy, Route, RouteTableBuilder};
//! use fdsn_federator::control_plane::routing_directory::RoutingDirectory;
//! use fdsn_federator::control_plane::virtual_network::VirtualNetworkTable;
//! use fdsn_federator::routing::resolver::get_route;
//! use fdsn_federator::routing::time_window::TimeWindow;
//! use fdsn_federator::Identifier;
//!
//! let mut builder = RouteTableBuilder::new(OverlapPolicy::Forbid);
//! builder.add_route(
//!     Identifier::new("GE", "*", "*", "*"),
//!     Route::new("dataselect", "http://geofon/query", TimeWindow::unbounded(), 1),
//! );
//! let directory = RoutingDirectory::new(builder.build(), VirtualNetworkTable::default());
//!
//! let merge = get_route(
//!     &directory.snapshot(),
//!     &Identifier::new("GE", "APE", "", "BHZ"),
//!     &TimeWindow::unbounded(),
//!     "dataselect",
//! )
//! .unwrap();
//! assert_eq!(merge.len(), 1);
//! assert_eq!(merge.iter().next().unwrap().url, "http://geofon/query");
//! ```

pub mod nslc_expansion;
pub mod pattern;
pub mod request_merge;
pub mod resolver;
pub mod time_window;
