//! 🔬欢迎光临🧫
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::Idx2d;

pub use crate::{
    BinaryMask, Calibration, ClusterOverlay, GrayscaleBuffer, ImageStack, ImgWriteVis,
    PixelCluster, PixelDepth, Rect, Samples,
};

pub use crate::error::{ConfigError, ConfigResult, DegenerateImage, MeasureError};

pub use crate::contour::{Connectivity, ContourLabeler};
pub use crate::edge::{
    BorderContactDetector, EdgeDetector, ExclusionRegion, IntensityEdgeDetector, NoEdgeDetector,
};
pub use crate::filter::{
    BackgroundModel, OtsuThresholder, Polarity, ThresholdParams, Thresholder,
};
pub use crate::measure::{RegionMeasurer, RegionStats};
pub use crate::morph::{CleanerOptions, MorphologicalCleaner};
pub use crate::ring::{RingExpander, RingGeometry};

pub use crate::pipeline::{
    AnalysisConfig, AnalysisResult, CellMeasurement, CellRecord, ExclusionReason, ImageStatus,
    NucleoCytoplasmicRatio, ObjectExclusion, RunContext, RunCounters, Stage,
};

pub use crate::dataset::{self, home_dataset_dir_with, read_stack, stack_loader};
