use anyhow::{Result, bail};
use clap::Parser;
use district_core::{DistrictArchetype, DistrictComposer, DistrictConfig};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Seed for the district to generate
    #[arg(short, long, default_value_t = 42)]
    seed: i64,
    /// District archetype: residential, commercial, industrial, or mixed
    #[arg(short, long, default_value = "mixed")]
    archetype: String,
    /// Dump the full metadata as JSON instead of a summary
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn parse_archetype(tag: &str) -> Result<DistrictArchetype> {
    Ok(match tag {
        "residential" => DistrictArchetype::Residential,
        "commercial" => DistrictArchetype::Commercial,
        "industrial" => DistrictArchetype::Industrial,
        "mixed" => DistrictArchetype::Mixed,
        other => bail!("unknown archetype '{other}'"),
    })
}

fn main() -> Result<()> {
    let args = Args::parse();
    let archetype = parse_archetype(&args.archetype)?;

    let composer = DistrictComposer::new(DistrictConfig::default())
        .map_err(|e| anyhow::anyhow!("invalid configuration: {:?}", e))?;
    let district = composer.generate(args.seed, archetype);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&district.metadata)?);
        return Ok(());
    }

    println!("District generated.");
    println!("Seed: {}", district.metadata.seed);
    println!("Archetype: {}", district.metadata.archetype.as_str());
    println!("Rooms: {}", district.metadata.room_count);
    println!("Corridors: {}", district.metadata.corridor_count);
    println!("Unresolved overlaps: {}", district.metadata.unresolved_overlaps);
    println!("Valid: {}", district.metadata.validation.valid);
    for issue in &district.metadata.validation.issues {
        println!("Issue: {issue}");
    }
    for warning in &district.metadata.validation.warnings {
        println!("Warning: {warning}");
    }
    println!("Snapshot hash: {}", district.snapshot_hash());

    Ok(())
}
