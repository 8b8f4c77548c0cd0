use clap::Parser;
use robin_hood_table::RobinHoodTable;
use robin_hood_table::hashing::Murmur3;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "target_capacity", default_value_t = 1000)]
    target_capacity: usize,

    /// Seed mixed into every key hash.
    #[arg(short = 's', long = "seed", default_value_t = 0)]
    seed: u32,

    /// Remove every n-th key after filling, to show backward shifts at work.
    #[arg(short = 'r', long = "remove_every")]
    remove_every: Option<usize>,
}

fn main() {
    let args = Args::parse();

    println!(
        "Creating RobinHoodTable with target capacity: {}",
        args.target_capacity
    );

    let hasher = Murmur3::with_seed(args.seed);
    let mut table: RobinHoodTable<String, usize, Murmur3> =
        RobinHoodTable::with_capacity_and_hasher(args.target_capacity, hasher);

    println!("Actual capacity: {}", table.capacity());

    // Fill right up to the load limit without triggering growth.
    let num_values = table.debug_stats().max_load;
    println!("Filling table with {num_values} string keys...");
    for i in 0..num_values {
        if table.put(format!("key_{i:08}"), i).is_some() {
            panic!("Key already exists in table: {i}");
        }
    }
    assert_eq!(table.capacity(), args.target_capacity.max(1).next_power_of_two());

    println!("Inserted {} values into table", table.len());
    println!(
        "Final load factor: {:.2}%",
        (table.len() as f64 / table.capacity() as f64) * 100.0
    );

    table.probe_histogram().print();
    table.debug_stats().print();

    if let Some(step) = args.remove_every.filter(|&step| step > 0) {
        let removed = (0..num_values)
            .step_by(step)
            .filter(|i| table.remove(&format!("key_{i:08}")).is_some())
            .count();
        println!();
        println!("Removed {removed} keys (every {step}th)");

        table.probe_histogram().print();
        table.debug_stats().print();
    }
}
