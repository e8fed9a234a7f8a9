//! Control-plane layer.
//!
//! Owns the routing tables: route insertion with overlap arbitration, virtual
//! network definitions and the snapshot handle through which a rebuilt pair of
//! tables is published to concurrent queries.
//!
//! ```
//! use fdsn_federator::control_plane::route_table::{
//!     OverlapPolicy, Route, RouteInsertion, RouteTableBuilder, DEFAULT_PRIORITY,
//! };
//! use fdsn_federator::routing::time_window::TimeWindow;
//! use fdsn_federator::Identifier;
//!
//! let mut builder = RouteTableBuilder::new(OverlapPolicy::Forbid);
//! let pattern = Identifier::new("GE", "*", "*", "*");
//! let geofon = Route::new(
//!     "dataselect",
//!     "http://geofon.gfz-potsdam.de/fdsnws/dataselect/1/query",
//!     TimeWindow::unbounded(),
//!     DEFAULT_PRIORITY,
//! );
//!
//! assert_eq!(builder.add_route(pattern.clone(), geofon.clone()), RouteInsertion::Inserted);
//! // The same offering again ties on service, window and priority.
//! assert!(matches!(
//!     builder.add_route(pattern, geofon),
//!     RouteInsertion::Rejected { .. }
//! ));
//! assert_eq!(builder.build().route_count(), 1);
//! ```

pub mod route_table;
pub mod routing_directory;
pub mod virtual_network;
