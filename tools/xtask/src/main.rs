//! # xtask - 开发辅助工具
//!
//! 提供本地质量门禁与开发辅助命令。
//!
//! ## 命令
//!
//! - `check-all`: 运行 fmt、clippy、test
//! - `cov-runtime`: 运行 transition-runtime 覆盖率
//! - `cov-workspace`: 运行 workspace 覆盖率
//! - `scene-check`: 检查场景文件（JSON 格式、状态引用、属性类型）

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use transition_runtime::Scene;
use walkdir::WalkDir;
use xshell::{Shell, cmd};

fn ensure_cargo_llvm_cov_available(sh: &Shell) -> anyhow::Result<()> {
    if cmd!(sh, "cargo llvm-cov --version").quiet().run().is_err() {
        anyhow::bail!(
            "cargo llvm-cov 不可用。\n\
请先安装：\n\
  - cargo install cargo-llvm-cov\n\
  - rustup component add llvm-tools-preview\n\
然后重试。"
        );
    }
    Ok(())
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        eprintln!("xtask error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let sub = args.next().unwrap_or_else(|| "help".to_string());
    let sh = Shell::new()?;

    match sub.as_str() {
        "check-all" => {
            eprintln!("\n==> cargo fmt --all -- --check");
            cmd!(sh, "cargo fmt --all -- --check").run()?;

            eprintln!("\n==> cargo clippy --workspace --all-targets");
            cmd!(sh, "cargo clippy --workspace --all-targets").run()?;

            eprintln!("\n==> cargo test --workspace");
            cmd!(sh, "cargo test --workspace").run()?;
        }
        "cov-runtime" => {
            ensure_cargo_llvm_cov_available(&sh)?;

            eprintln!("\n==> cargo llvm-cov -p transition-runtime --html");
            cmd!(sh, "cargo llvm-cov -p transition-runtime --html").run()?;

            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        "cov-workspace" => {
            ensure_cargo_llvm_cov_available(&sh)?;

            // 排除工具 crate（xtask/transition-cli），只观察引擎本身
            eprintln!("\n==> cargo llvm-cov --workspace --exclude xtask --exclude transition-cli --html");
            cmd!(
                sh,
                "cargo llvm-cov --workspace --exclude xtask --exclude transition-cli --html"
            )
            .run()?;

            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        "scene-check" => {
            let path = args.next();
            scene_check(path.as_deref())?;
        }
        "help" | "-h" | "--help" => {
            print_help();
        }
        other => anyhow::bail!("unknown xtask subcommand: {other}"),
    }

    Ok(())
}

fn print_help() {
    eprintln!(
        r#"xtask - 开发辅助工具

USAGE:
  cargo xtask <command>

COMMANDS:
  check-all       运行 fmt、clippy、test 门禁检查
  cov-runtime     运行 transition-runtime 覆盖率报告
  cov-workspace   运行 workspace 覆盖率报告
  scene-check     检查场景文件

SCENE-CHECK:
  cargo xtask scene-check [path]

  不带参数：检查 scenes/ 下所有 .json 文件
  带路径参数：检查指定文件或目录

  检查内容：
    - JSON 格式与字段类型
    - 播放列表引用的状态是否已定义
    - 状态中的属性是否为演示目标上同类型的可动画属性
    - 过渡参数（时长、帧率）是否合法
"#
    );
}

//=============================================================================
// scene-check 命令实现
//=============================================================================

/// 默认场景目录（相对于 workspace root）
const SCENES_DIR: &str = "scenes";

/// 执行场景检查
fn scene_check(path: Option<&str>) -> anyhow::Result<()> {
    let files = match path {
        Some(p) => {
            let path = PathBuf::from(p);
            if path.is_file() {
                vec![path]
            } else if path.is_dir() {
                collect_scene_files(&path)
            } else {
                anyhow::bail!("路径不存在: {}", p);
            }
        }
        None => {
            let dir = Path::new(SCENES_DIR);
            if !dir.exists() {
                anyhow::bail!(
                    "默认场景目录不存在: {}\n请在 workspace 根目录运行，或指定场景路径",
                    dir.display()
                );
            }
            collect_scene_files(dir)
        }
    };

    if files.is_empty() {
        eprintln!("未找到场景文件（.json）");
        return Ok(());
    }

    eprintln!("==> 检查 {} 个场景文件...\n", files.len());

    let mut errors = 0usize;
    let mut steps = 0usize;
    for file in &files {
        match Scene::load(file) {
            Ok(scene) => {
                steps += scene.play.len();
                if scene.play.is_empty() {
                    eprintln!("[WARN] {}: 播放列表为空", file.display());
                }
            }
            Err(e) => {
                eprintln!("[ERROR] {}: {}", file.display(), e);
                errors += 1;
            }
        }
    }

    eprintln!("─────────────────────────────────────────────────────");
    eprintln!("检查完成: {} 个场景, {} 个播放步骤", files.len(), steps);
    if errors > 0 {
        eprintln!("❌ {} 个错误", errors);
        anyhow::bail!("场景检查发现错误");
    }
    eprintln!("✅ 检查通过，无错误");
    Ok(())
}

/// 收集目录下的所有场景文件
fn collect_scene_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    files
}
