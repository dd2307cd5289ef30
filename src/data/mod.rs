/// Data layer: core types, generation, CSV persistence and grouping.
///
/// Architecture:
/// ```text
///  SurveyConfig (habitat profiles)       .csv
///        │                                 │
///        ▼                                 ▼
///   ┌──────────┐                     ┌──────────┐
///   │ generate │  seeded sampling    │  loader  │  parse + schema check
///   └──────────┘                     └──────────┘
///        │                                 │
///        └──────────────┬──────────────────┘
///                       ▼
///               ┌──────────────┐
///               │   Dataset    │  Vec<Observation>, habitat order
///               └──────────────┘
///                       │
///                       ▼
///               ┌──────────────┐
///               │    filter    │  group rows by habitat
///               └──────────────┘
/// ```

pub mod filter;
pub mod generate;
pub mod loader;
pub mod model;
