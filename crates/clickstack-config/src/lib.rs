// clickstack-config - the pipeline configuration model
//
// A pipeline configuration is the customer's deployment intent as persisted
// by the control plane: network placement, ingestion sink, analytics engine
// and reporting choices. It is immutable input to parameter derivation.
// Resolved resources are the runtime facts gathered per deployment attempt
// to fill the gaps the raw configuration cannot know (endpoints, broker
// lists, template ARNs).
//
// Wire format is camelCase JSON, matching the console API.

mod pipeline;
mod resources;

pub use pipeline::*;
pub use resources::*;
