use clap::Parser;
use long_map::AnyKey;
use long_map::LongMap;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'n', long = "entries", default_value_t = 1000)]
    entries: usize,

    /// Draw keys uniformly from the whole `i64` range instead of `0..entries`.
    #[arg(short = 'r', long = "random")]
    random: bool,
}

fn main() -> Result<(), long_map::Error> {
    let args = Args::parse();

    println!("Creating LongMap sized for {} entries", args.entries);

    let mut map = LongMap::with_capacity_and_validator(args.entries, AnyKey);
    println!(
        "Initial capacity: {} buckets (threshold {})",
        map.capacity(),
        map.threshold()
    );

    let mut rng = SmallRng::from_os_rng();
    for i in 0..args.entries {
        let key = if args.random {
            rng.random::<i64>()
        } else {
            i as i64
        };
        map.put(key, i)?;
    }

    println!("Inserted {} entries", map.len());
    println!(
        "Final capacity: {} buckets (threshold {})",
        map.capacity(),
        map.threshold()
    );

    map.print_bucket_histogram();
    map.debug_stats().print();
    Ok(())
}
