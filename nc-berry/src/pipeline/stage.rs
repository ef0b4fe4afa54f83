#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 单幅图像的处理阶段.
///
/// 正常流程为 `Init → EdgeChecked → Thresholded → Cleaned → Labeled →
/// RingsBuilt → Measured → Done`. 图像只能在 `EdgeChecked` 阶段被整体排除
/// (检测到边缘且配置为跳过, 或无法分割), 此后停留在 `Excluded`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Stage {
    /// 尚未开始.
    #[default]
    Init,
    /// 完成边缘检测.
    EdgeChecked,
    /// 完成阈值分割.
    Thresholded,
    /// 完成形态学清理.
    Cleaned,
    /// 完成连通区域标记.
    Labeled,
    /// 完成胞质环构造.
    RingsBuilt,
    /// 完成强度测量.
    Measured,
    /// 结束.
    Done,
    /// 整幅图像被排除.
    Excluded,
}

impl Stage {
    /// 正常流程中的下一个阶段. `Done` 与 `Excluded` 没有后继.
    pub const fn next(self) -> Option<Stage> {
        match self {
            Stage::Init => Some(Stage::EdgeChecked),
            Stage::EdgeChecked => Some(Stage::Thresholded),
            Stage::Thresholded => Some(Stage::Cleaned),
            Stage::Cleaned => Some(Stage::Labeled),
            Stage::Labeled => Some(Stage::RingsBuilt),
            Stage::RingsBuilt => Some(Stage::Measured),
            Stage::Measured => Some(Stage::Done),
            Stage::Done | Stage::Excluded => None,
        }
    }

    /// 能否从当前阶段转入 `Excluded`.
    #[inline]
    pub const fn can_exclude(self) -> bool {
        matches!(self, Stage::EdgeChecked)
    }

    /// 是否为终止阶段.
    #[inline]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Stage::Done | Stage::Excluded)
    }
}

/// 阶段跟踪器, 保证只发生合法的转移.
#[derive(Debug)]
pub(crate) struct StageTracker<'a> {
    position: &'a str,
    stage: Stage,
}

impl<'a> StageTracker<'a> {
    pub(crate) fn new(position: &'a str) -> Self {
        Self {
            position,
            stage: Stage::Init,
        }
    }

    #[inline]
    pub(crate) fn stage(&self) -> Stage {
        self.stage
    }

    /// 转入下一阶段.
    ///
    /// # 注意
    ///
    /// 调用方保证当前阶段不是终止阶段; 在终止阶段调用时阶段保持不变.
    pub(crate) fn advance(&mut self) -> Stage {
        if let Some(next) = self.stage.next() {
            log::debug!("[{}] {:?} -> {:?}", self.position, self.stage, next);
            self.stage = next;
        }
        self.stage
    }

    /// 排除整幅图像. 只有 [`Stage::can_exclude`] 成立时才会转移.
    pub(crate) fn exclude(&mut self) -> Stage {
        if self.stage.can_exclude() {
            log::debug!("[{}] {:?} -> {:?}", self.position, self.stage, Stage::Excluded);
            self.stage = Stage::Excluded;
        }
        self.stage
    }
}
