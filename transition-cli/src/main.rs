//! # Transition CLI
//!
//! 场景播放与帧序列预览工具。
//!
//! ## 用法
//!
//! ```bash
//! # 在项目根目录使用 cargo 运行
//! cargo run -p transition-cli -- play scenes/fade.json
//! cargo run -p transition-cli -- play scenes/fade.json --trace-frames
//! cargo run -p transition-cli -- frames scenes/slide.json
//! cargo run -p transition-cli -- check scenes/fade.json scenes/slide.json
//!
//! # 指定引擎配置与日志级别
//! transit --config engine.json --log-level debug play scenes/pulse.json
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use transition_runtime::{EngineConfig, Scene, TransitionScheduler, config};

#[derive(Parser)]
#[command(name = "transit")]
#[command(about = "属性过渡引擎 - 播放和预览 JSON 场景")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 引擎配置文件（默认帧率、帧率上限）
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// 日志级别（trace/debug/info/warn/error）
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// 实时播放场景，结束后输出目标的最终属性
    Play {
        /// 场景文件路径
        scene: PathBuf,

        /// 每帧写入后记录目标属性
        #[arg(long)]
        trace_frames: bool,
    },

    /// 不播放，直接输出每一步的帧序列（JSON）
    Frames {
        /// 场景文件路径
        scene: PathBuf,
    },

    /// 验证场景文件
    Check {
        /// 场景文件路径
        #[arg(required = true)]
        scenes: Vec<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    if let Err(e) = run(cli) {
        eprintln!("❌ {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    if let Some(path) = &cli.config {
        let engine = EngineConfig::load(path)?;
        config::set_global(engine)?;
    }

    match cli.command {
        Commands::Play {
            scene,
            trace_frames,
        } => play(&scene, trace_frames),
        Commands::Frames { scene } => frames(&scene),
        Commands::Check { scenes } => check(&scenes),
    }
}

fn load_scene(path: &Path) -> anyhow::Result<Scene> {
    Scene::load(path).with_context(|| format!("加载场景失败: {}", path.display()))
}

/// 在单线程 runtime 上播放整个播放列表
fn play(path: &Path, trace_frames: bool) -> anyhow::Result<()> {
    let scene = load_scene(path)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("创建 UI runtime 失败")?;

    let final_state = runtime.block_on(async {
        let sprite = scene.sprite();
        let scheduler = TransitionScheduler::for_target(sprite.clone())?;
        scene.install(&scheduler);

        for (index, step) in scene.play.iter().enumerate() {
            let name = step.state.clone();
            let mut params = step.params.clone();

            let started = name.clone();
            params = params.on_start(move || info!(step = index, state = %started, "开始过渡"));

            if trace_frames {
                let observed = Arc::clone(&sprite);
                params = params.on_late_update(move || {
                    let data = observed.snapshot();
                    debug!(
                        opacity = data.opacity,
                        background = %data.background,
                        x = data.position.x,
                        y = data.position.y,
                        "帧已写入"
                    );
                });
            }

            let finished = name.clone();
            params = params.on_completed(move || info!(step = index, state = %finished, "过渡结束"));

            scheduler.enqueue(&name, params, None)?;
        }

        scheduler.wait_idle().await;
        anyhow::Ok(sprite.snapshot())
    })?;

    println!("{}", serde_json::to_string_pretty(&final_state)?);
    Ok(())
}

/// 输出每一步的帧序列
fn frames(path: &Path) -> anyhow::Result<()> {
    let scene = load_scene(path)?;
    let previews = scene.preview();
    println!("{}", serde_json::to_string_pretty(&previews)?);
    Ok(())
}

/// 逐个验证场景文件
fn check(paths: &[PathBuf]) -> anyhow::Result<()> {
    let mut failed = 0usize;
    for path in paths {
        match Scene::load(path) {
            Ok(scene) => println!(
                "✅ {}: {} 个状态, {} 步",
                path.display(),
                scene.states.len(),
                scene.play.len()
            ),
            Err(e) => {
                eprintln!("[ERROR] {}: {e}", path.display());
                failed += 1;
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} 个场景文件验证失败");
    }
    Ok(())
}
