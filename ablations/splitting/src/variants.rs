//! 参与比较的清理变体.

use crate::profile::Profile;
use nc_berry::prelude::*;
use std::path::Path;
use utils::loader;

/// 一种清理步骤组合.
#[derive(Copy, Clone, Debug)]
pub struct Variant {
    pub name: &'static str,
    close: bool,
    fill_holes: bool,
    watershed: bool,
}

impl Variant {
    const fn new(name: &'static str, close: bool, fill_holes: bool, watershed: bool) -> Self {
        Self {
            name,
            close,
            fill_holes,
            watershed,
        }
    }

    /// 把开关写进 `cfg`, 其余参数保持不变.
    fn apply(&self, cfg: &mut AnalysisConfig) {
        cfg.cleaner.close = self.close;
        cfg.cleaner.fill_holes = self.fill_holes;
        cfg.cleaner.watershed = self.watershed;
    }
}

pub const VARIANTS: [Variant; 4] = [
    Variant::new("bare", false, false, false),
    Variant::new("close", true, false, false),
    Variant::new("close+fill", true, true, false),
    Variant::new("full", true, true, true),
];

/// 以变体 `v` 分析 `p` 下的全部位点.
///
/// 每批读取与核心数相同个数的位点, 批内并行分析.
pub fn run_variant(v: Variant, p: &Path, base: &[u8]) -> Profile {
    let mut cfg = AnalysisConfig::from_bytes(base).expect("Config decoding error");
    v.apply(&mut cfg);
    let analyzer = NucleoCytoplasmicRatio::new(cfg).expect("Invalid analysis config");

    let batch_len = utils::cpus();
    let mut profile = Profile::new();
    let mut ctx = RunContext::new();
    let mut stacks = loader::stack_loader(p).expect("Reading dataset directory error");
    loop {
        let batch: Vec<_> = stacks.by_ref().take(batch_len).collect();
        if batch.is_empty() {
            break;
        }
        let mut readable = Vec::with_capacity(batch.len());
        for (name, stack) in batch {
            match stack {
                Ok(stack) => readable.push(stack),
                Err(e) => {
                    log::warn!("{}: skipping `{name}`: {e}", v.name);
                    profile.count_unreadable();
                }
            }
        }
        log::info!("{}: {} stacks left...", v.name, stacks.len());

        profile.target_start();
        let results = analyzer.par_analyze(&readable, &mut ctx);
        profile.target_elapsed();
        for (stack, result) in readable.iter().zip(results) {
            match result {
                Ok(result) => profile.count_result(&result),
                Err(e) => {
                    log::warn!("{}: `{}` rejected: {e}", v.name, stack.position);
                    profile.count_unreadable();
                }
            }
        }
    }
    profile.finish(ctx.counters())
}
