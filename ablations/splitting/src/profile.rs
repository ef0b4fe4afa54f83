//! 变体运行统计.

use nc_berry::pipeline::{AnalysisResult, RunCounters};
use std::time::{Duration, Instant};

/// 分段累计计时器.
///
/// 该计时器支持 "中途中断" 与 "结束中断, 继续开始计时".
#[derive(Clone, Debug)]
struct AccTimer {
    consumed: Duration,
    since: Instant,
}

impl AccTimer {
    /// 初始化计时器. 初始化时会视为已经开始计时.
    #[inline]
    fn new() -> Self {
        Self {
            consumed: Duration::ZERO,
            since: Instant::now(),
        }
    }

    /// 开始计时.
    #[inline]
    fn start(&mut self) {
        self.since = Instant::now();
    }

    /// 结束计时, 并将这一区间的时间累加. 返回本轮计时时长.
    ///
    /// # 注意
    ///
    /// 上一次调用必须是 `self.start()`, 否则计算时间值无意义.
    #[inline]
    fn elapsed(&mut self) -> Duration {
        let d = self.since.elapsed();
        self.consumed += d;
        d
    }

    /// 累计时间 (微秒).
    #[inline]
    fn total_us(&self) -> u64 {
        self.consumed.as_micros() as u64
    }
}

/// 一个变体的运行统计.
#[derive(Clone, Debug)]
pub struct Profile {
    /// 无法读取或被拒绝的位点个数.
    unreadable: u64,

    /// 细胞核面积的总和 (像素), 用于比较切分粒度.
    nucleus_pixels: u64,

    /// 核质比之和.
    ratio_sum: f64,

    /// 分析花费的总时间 (不含读取).
    target_time: AccTimer,

    /// 整个任务花费的总时间.
    real_time: AccTimer,

    /// 最耗时的一批.
    most: Option<Duration>,

    /// 运行结束时的计数.
    counters: RunCounters,
}

impl Profile {
    /// 初始化.
    #[inline]
    pub fn new() -> Self {
        Self {
            unreadable: 0,
            nucleus_pixels: 0,
            ratio_sum: 0.0,
            target_time: AccTimer::new(),
            real_time: AccTimer::new(),
            most: None,
            counters: RunCounters::default(),
        }
    }

    /// 记录一个无法分析的位点.
    #[inline]
    pub fn count_unreadable(&mut self) {
        self.unreadable += 1;
    }

    /// 记录一幅图像的分析结果.
    pub fn count_result(&mut self, result: &AnalysisResult) {
        self.nucleus_pixels += result.nuclei().iter().map(|n| n.len() as u64).sum::<u64>();
        self.ratio_sum += result.ratios().sum::<f64>();
    }

    /// 开始一批分析的计时.
    #[inline]
    pub fn target_start(&mut self) {
        self.target_time.start();
    }

    /// 结束一批分析的计时.
    #[inline]
    pub fn target_elapsed(&mut self) {
        let d = self.target_time.elapsed();
        self.most = Some(self.most.map_or(d, |m| m.max(d)));
    }

    /// 结束全部计时.
    #[inline]
    pub fn finish(mut self, counters: RunCounters) -> Self {
        self.real_time.elapsed();
        self.counters = counters;
        self
    }

    /// 运行计数.
    #[inline]
    pub fn counters(&self) -> &RunCounters {
        &self.counters
    }

    /// 无法分析的位点个数.
    #[inline]
    pub fn unreadable(&self) -> u64 {
        self.unreadable
    }

    /// 平均核质比. 没有细胞时返回 `None`.
    pub fn avg_ratio(&self) -> Option<f64> {
        match self.counters.cell_count {
            0 => None,
            n => Some(self.ratio_sum / n as f64),
        }
    }

    /// 平均细胞核面积 (像素). 没有细胞时返回 `None`.
    pub fn avg_nucleus_pixels(&self) -> Option<f64> {
        match self.counters.cell_count {
            0 => None,
            n => Some(self.nucleus_pixels as f64 / n as f64),
        }
    }

    /// 分析总时间 (微秒).
    #[inline]
    pub fn target_time_us(&self) -> u64 {
        self.target_time.total_us()
    }

    /// 运行总时间 (微秒).
    #[inline]
    pub fn real_time_us(&self) -> u64 {
        self.real_time.total_us()
    }

    /// 最耗时的一批所用时间.
    #[inline]
    pub fn most_time_consuming(&self) -> Option<Duration> {
        self.most
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::new()
    }
}
