use aisle::capability::{self, CapabilityDescriptor, IntensityTier, PerformanceProbe, UserPreference};
use aisle::motion::AnimationOverrides;
use aisle::{config, generate, output};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("AISLE_ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("AISLE_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "aisle")]
#[command(about = "Motion assets for wedding-planning sites")]
#[command(long_about = "\
Motion assets for wedding-planning sites

Aisle ships a catalog of named entrance animations (fadeInUp, royalEntrance,
goldShimmer, ...) plus scroll-linked effects, and renders them into static
CSS and a small runtime script. Every animation has three intensity tiers;
visitors who prefer reduced motion get near-instant fades with no overlays.

Site structure:

  site/
  ├── config.toml          # Site config (optional, merged over stock defaults)
  └── ...

Output:

  dist/
  ├── motion.<hash>.css    # Colors, base rules, every animation at every tier
  ├── motion.<hash>.js     # Tier probe, visibility latches, scroll driver
  ├── motion.<hash>.json   # Manifest read by the runtime
  └── index.html           # Preview page with one specimen per animation

Run 'aisle gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Site directory containing config.toml
    #[arg(long, default_value = "site", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    #[command(subcommand)]
    command: Command,
}

/// Tier selection on the command line.
#[derive(Clone, Copy, ValueEnum)]
enum TierArg {
    Low,
    Medium,
    High,
}

impl From<TierArg> for IntensityTier {
    fn from(tier: TierArg) -> Self {
        match tier {
            TierArg::Low => IntensityTier::Low,
            TierArg::Medium => IntensityTier::Medium,
            TierArg::High => IntensityTier::High,
        }
    }
}

/// Capability selection shared by commands that resolve descriptors.
#[derive(clap::Args, Clone)]
struct CapabilityArgs {
    /// Force a tier instead of using the configured signals
    #[arg(long, value_enum)]
    tier: Option<TierArg>,

    /// Resolve as if motion were switched off
    #[arg(long)]
    motionless: bool,
}

impl CapabilityArgs {
    fn capability(&self, motion: &config::MotionConfig) -> CapabilityDescriptor {
        if self.motionless {
            CapabilityDescriptor::motionless()
        } else if let Some(tier) = self.tier {
            CapabilityDescriptor::with_tier(tier.into())
        } else {
            capability::resolve(&motion.signals())
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Resolve the motion capability from environment signals
    Resolve {
        /// prefers-reduced-motion is set
        #[arg(long)]
        reduced_motion: bool,
        /// The visitor switched motion off
        #[arg(long)]
        motion_off: bool,
        /// WebGL renderer string
        #[arg(long)]
        gpu: Option<String>,
        /// Logical CPU cores
        #[arg(long)]
        cores: Option<u32>,
        /// Device memory in GB
        #[arg(long)]
        memory: Option<f32>,
        /// JS heap headroom in MiB
        #[arg(long)]
        heap: Option<u64>,
    },
    /// List every registered animation
    Animations(CapabilityArgs),
    /// Show one animation's resolved descriptor
    Show {
        name: String,
        #[command(flatten)]
        capability: CapabilityArgs,
        /// Override the duration in seconds
        #[arg(long)]
        duration: Option<f64>,
        /// Override the delay in seconds
        #[arg(long)]
        delay: Option<f64>,
        /// Print the descriptor as JSON
        #[arg(long)]
        json: bool,
    },
    /// Tabulate a scroll effect across its progress range
    Sample {
        effect: String,
        /// Number of intervals between progress 0 and 1
        #[arg(long, default_value_t = 10)]
        steps: usize,
    },
    /// Render motion assets and the preview page
    Build,
    /// Validate config.toml without building
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Resolve {
            reduced_motion,
            motion_off,
            gpu,
            cores,
            memory,
            heap,
        } => {
            let site = config::load_config(&cli.source)?;
            let mut signals = site.motion.signals();
            if reduced_motion {
                signals.reduced_motion = Some(true);
            }
            if motion_off {
                signals.user_preference = UserPreference::Off;
            }
            if gpu.is_some() || cores.is_some() || memory.is_some() || heap.is_some() {
                signals.probe = Some(PerformanceProbe {
                    gpu_renderer: gpu,
                    heap_headroom_mb: heap,
                    logical_cores: cores,
                    device_memory_gb: memory,
                });
            }
            output::print_capability(&capability::resolve(&signals));
        }
        Command::Animations(args) => {
            let site = config::load_config(&cli.source)?;
            let registry = site.registry()?;
            output::print_animation_list(&registry, &args.capability(&site.motion))?;
        }
        Command::Show {
            name,
            capability,
            duration,
            delay,
            json,
        } => {
            let site = config::load_config(&cli.source)?;
            let registry = site.registry()?;
            let cap = capability.capability(&site.motion);
            let overrides = AnimationOverrides {
                duration,
                delay,
                ease: None,
            };
            let desc = registry.get_with(&name, &cap, &overrides)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&desc)?);
            } else {
                output::print_descriptor(&desc, &cap);
            }
        }
        Command::Sample { effect, steps } => {
            let site = config::load_config(&cli.source)?;
            let Some(effect_config) = site.scroll_effect(&effect) else {
                return Err(format!("no scroll effect named '{effect}' in config").into());
            };
            let smoothing = effect_config.smooth.then_some(effect_config.stiffness);
            output::print_sample_table(&effect, &effect_config.effect()?, smoothing, steps);
        }
        Command::Build => {
            println!("==> Loading {}", cli.source.display());
            let site = config::load_config(&cli.source)?;
            let registry = site.registry()?;

            println!("==> Rendering motion assets → {}", cli.output.display());
            let report = generate::generate(&site, &registry, &cli.output)?;
            output::print_generate_report(&report);

            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let site = config::load_config(&cli.source)?;
            let registry = site.registry()?;
            output::print_check_summary(&registry, site.motion.animations.len(), site.scroll.len());
            println!("==> Config is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Log to stderr, filtered by `RUST_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
