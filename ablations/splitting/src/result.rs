//! 实验结果.

use crate::profile::Profile;
use std::io::{self, Write};

/// 将 `profile` 的结果写进 `w` 中.
fn describe_into<W: Write>(name: &str, p: &Profile, w: &mut W) -> io::Result<()> {
    const S4: &str = "    ";

    #[inline]
    fn f64_to_display(f: Option<f64>) -> String {
        match f {
            Some(f) => format!("{f:.6}"),
            None => "/".to_string(),
        }
    }

    let c = p.counters();
    writeln!(w, "Profile `{name}`:")?;
    writeln!(w, "{S4}Analyzed images: {}", c.images_analyzed)?;
    writeln!(w, "{S4}Skipped images: {}", c.images_skipped)?;
    writeln!(w, "{S4}Unreadable stacks: {}", p.unreadable())?;
    writeln!(w, "{S4}Objects: {}", c.object_count)?;
    writeln!(w, "{S4}Excluded objects: {}", c.objects_excluded)?;
    writeln!(w, "{S4}Cells: {}", c.cell_count)?;
    writeln!(w, "{S4}Average ratio: {}", f64_to_display(p.avg_ratio()))?;
    writeln!(
        w,
        "{S4}Average nucleus size: {} px",
        f64_to_display(p.avg_nucleus_pixels())
    )?;
    writeln!(w, "{S4}Analysis time: {} us", p.target_time_us())?;
    writeln!(w, "{S4}Total machine time: {} us", p.real_time_us())?;
    let t = p.most_time_consuming().map(|d| d.as_micros() as f64);
    write!(w, "{S4}Slowest batch costs {} us", f64_to_display(t))?;
    Ok(())
}

/// 消融实验最终结果.
pub struct AblationResult {
    data: Vec<(&'static str, Profile)>,
}

impl AblationResult {
    pub fn from_iter<I: IntoIterator<Item = (&'static str, Profile)>>(it: I) -> Self {
        Self {
            data: it.into_iter().collect(),
        }
    }

    /// 打印运行结果.
    pub fn analyze(&self) {
        utils::sep();
        let mut buf = Vec::with_capacity(512);

        for (key, profile) in self.data.iter() {
            match describe_into(key, profile, &mut buf) {
                Ok(()) => println!("{}", String::from_utf8_lossy(&buf)),
                Err(e) => log::error!("Cannot describe `{key}`: {e}"),
            }
            buf.clear();

            utils::sep();
        }
    }
}
