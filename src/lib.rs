// Library exports for tradegraph

pub mod aggregate;
pub mod config;
pub mod filter;
pub mod finalize;
pub mod pipeline;
pub mod postprocess;
pub mod profile;
pub mod reader;
pub mod record;
pub mod resolve;
pub mod series;

pub use config::{AggFn, ChartConfig, ChartKind, ConfigAction, ConfigError, FieldRole, FilterSpec};
pub use pipeline::{run, PipelineError};
pub use profile::{ColumnInfo, ColumnType};
pub use record::{Dataset, Record};
pub use series::{ChartData, SeriesData};
