/// Signal-processing stages.
///
/// ```text
///  raw absorbance
///        │
///        ▼
///   ┌──────────┐
///   │ baseline  │  raw − SG(raw, 51, 3)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ smoother  │  SG(corrected, 101|151, 3), optional lift to ≥ 0
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  peaks    │  strict maxima ≥ height, width ≥ min width
///   └──────────┘
/// ```

pub mod baseline;
pub mod peaks;
pub mod savgol;
pub mod smoother;

pub use baseline::BaselineCorrector;
pub use peaks::{find_peaks, PeakDetector};
pub use savgol::SavitzkyGolay;
pub use smoother::Smoother;
