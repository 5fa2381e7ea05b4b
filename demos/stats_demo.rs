use clap::Parser;
use clap::ValueEnum;
use probe_hash::IntIntMap;
use probe_hash::UIntIntMap;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Keys {
    /// 0, 1, 2, ...
    Sequential,
    /// Uniform over the non-negative `i32`s.
    Random,
    /// Multiples of the initial capacity, a worst case for weak mixing.
    Strided,
}

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "target_capacity", default_value_t = 1000)]
    target_capacity: usize,

    #[arg(short = 'k', long = "keys", value_enum, default_value_t = Keys::Sequential)]
    keys: Keys,

    /// Fraction of inserted keys to remove again before reporting.
    #[arg(short = 'r', long = "remove_fraction", default_value_t = 0.0)]
    remove_fraction: f64,

    #[arg(long = "seed", default_value_t = 0x5eed)]
    seed: u64,
}

fn main() -> Result<(), probe_hash::Error> {
    let args = Args::parse();

    println!(
        "Creating IntIntMap with target capacity: {}",
        args.target_capacity
    );

    let mut packed = IntIntMap::with_capacity(args.target_capacity)?;
    let mut unsigned = UIntIntMap::with_capacity(args.target_capacity)?;
    let initial_capacity = packed.capacity();

    println!("Actual capacity: {initial_capacity}");
    println!("Expansion threshold: {}", packed.threshold());

    let mut rng = SmallRng::seed_from_u64(args.seed);
    let keys: Vec<i32> = (0..packed.threshold())
        .map(|i| match args.keys {
            Keys::Sequential => i as i32,
            Keys::Random => rng.random_range(0..i32::MAX),
            Keys::Strided => ((i * initial_capacity) & i32::MAX as usize) as i32,
        })
        .collect();

    println!("Filling maps with {} {:?} keys...", keys.len(), args.keys);
    for &key in &keys {
        packed.put(key, key)?;
        unsigned.put(key, key)?;
    }

    let to_remove = (keys.len() as f64 * args.remove_fraction.clamp(0.0, 1.0)) as usize;
    for &key in keys.iter().take(to_remove) {
        packed.remove(key);
        unsigned.remove(key);
    }

    println!(
        "Packed map: {} entries, {} tombstones, capacity {}",
        packed.len(),
        packed.tombstones(),
        packed.capacity()
    );
    println!(
        "Final load factor: {:.2}%",
        (packed.len() as f64 / packed.capacity() as f64) * 100.0
    );
    packed.probe_stats().print();

    println!();
    println!(
        "Unsigned map: {} entries, capacity {}",
        unsigned.len(),
        unsigned.capacity()
    );
    unsigned.probe_stats().print();

    Ok(())
}
