//! 细胞核切分消融实验.
//!
//! 在同一批位点上比较形态学清理各步骤 (闭运算, 空洞填充, 分水岭) 的取舍
//! 对细胞个数与核质比的影响.

mod profile;
mod result;
mod runner;
mod variants;

fn main() {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .init()
        .expect("Logger initialization error");

    let result = runner::run();
    result.analyze();
}
