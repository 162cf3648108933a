/// Data layer: core types and loading.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Spectrum (Wavelength, Absorbance)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Spectrum  │  immutable, index-aligned x / y
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod synthetic;
