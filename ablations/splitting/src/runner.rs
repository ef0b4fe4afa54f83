//! 程序运行函数.

use crate::result::AblationResult;
use crate::variants::{self, VARIANTS};
use nc_berry::pipeline::AnalysisConfig;
use std::thread;
use utils::loader;

/// 实际运行.
pub fn run() -> AblationResult {
    let stack_dir = loader::stack_dir_from_env_or_home().expect("Cannot locate dataset directory");
    assert!(stack_dir.is_dir(), "`{}` is not a directory", stack_dir.display());
    let p = stack_dir.as_path();

    // 短路判断
    assert!(
        loader::stack_loader(p)
            .expect("Reading dataset directory error")
            .next()
            .is_some_and(|(_, r)| r.is_ok()),
        "Loading dataset config error"
    );

    // 所有变体共享同一份基础配置, 只修改清理选项.
    let base = AnalysisConfig::default()
        .to_bytes()
        .expect("Config encoding error");
    let base = base.as_slice();

    log::info!("Running ablation studies on {} cores...", utils::cpus());
    thread::scope(|s| {
        let handles = VARIANTS.map(|v| s.spawn(move || variants::run_variant(v, p, base)));

        AblationResult::from_iter(
            VARIANTS.iter().map(|v| v.name).zip(
                handles
                    .into_iter()
                    .map(|th| th.join().expect("Thread joining error")),
            ),
        )
    })
}
