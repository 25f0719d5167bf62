use geostream::{Config, Dataset, Engine, Point, RadiusShape};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (set RUST_LOG=debug to see pipeline stages)
    env_logger::init();

    println!("=== GeoStream - Getting Started ===\n");

    let mut engine = Engine::new();
    println!("✓ Created engine with default configuration\n");

    // === REGISTRATION ===
    println!("1. Registering destinations and candidates");
    println!("------------------------------------------");

    engine.add_destination("Downtown_Central");
    engine.add_destination("Airport");
    engine.add_candidate("Driver_A", Point::new(2.0, 2.0));
    engine.add_candidate("Driver_B", Point::new(5.0, 5.0));
    engine.blacklist("hacker_01");

    let stats = engine.stats();
    println!(
        "   {} destinations, {} candidates, {} denylisted\n",
        stats.destinations, stats.candidates, stats.denylisted
    );

    // === DISPATCH ===
    println!("2. Dispatch requests");
    println!("--------------------");

    let origin = Point::new(0.0, 0.0);
    println!("   user_123 → Downtown_Central");
    println!(
        "     {}",
        engine.find_best_candidate("user_123", "Downtown_Central", origin)
    );
    println!("   hacker_01 → Downtown_Central");
    println!(
        "     {}",
        engine.find_best_candidate("hacker_01", "Downtown_Central", origin)
    );
    println!("   user_123 → Nonexistent_Place");
    println!(
        "     {}",
        engine.find_best_candidate("user_123", "Nonexistent_Place", origin)
    );
    println!("   user_123 → Airport from (500, 500)");
    println!(
        "     {}\n",
        engine.find_best_candidate("user_123", "Airport", Point::new(500.0, 500.0))
    );

    // === BULK LOAD ===
    println!("3. Bulk loading a city");
    println!("----------------------");

    let mut dataset = Dataset::new();
    for name in ["North Street", "North Avenue", "South Road", "Suburbs"] {
        dataset = dataset.with_destination(name);
    }
    for i in 0..50 {
        let x = ((i * 37) % 100) as f64 - 50.0;
        let y = ((i * 53) % 100) as f64 - 50.0;
        dataset = dataset.with_candidate(format!("Driver_{i:03}"), x, y);
    }

    let config = Config::default()
        .with_search_radius(15.0)
        .with_radius_shape(RadiusShape::Circle);
    let mut city = Engine::builder().config(config).dataset(dataset).build()?;
    println!("   Loaded {} candidates", city.stats().candidates);
    println!("   Destinations starting with 'North': {:?}", city.complete_destination("North"));
    println!(
        "   {}\n",
        city.find_best_candidate("user_777", "Suburbs", Point::new(10.0, -5.0))
    );

    // === INTROSPECTION ===
    println!("4. Security filter");
    println!("------------------");

    let filter = engine.filter_stats();
    println!("   Bit array size:     {}", filter.size_bits);
    println!("   Hash functions:     {}", filter.hash_functions);
    println!("   Target FP rate:     {}", filter.false_positive_rate);
    println!(
        "   Estimated FP rate:  {:.2e}",
        filter.estimated_false_positive_rate
    );

    let stats = engine.stats();
    println!(
        "\n   Requests: {} ({} assigned, {} rejected)",
        stats.requests,
        stats.assignments,
        stats.rejected()
    );

    println!("\n=== Done ===");
    Ok(())
}
