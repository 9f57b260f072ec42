use qcar_sim::*;

fn main() {
    let config = SweepConfig {
        initial_headings: vec![0.0, 90.0],
        samples_per_heading: 40,
        ..SweepConfig::default()
    };

    println!("Sweeping headings {:?}...", config.initial_headings);
    let samples = match collect_sweep(&config) {
        Ok(samples) => samples,
        Err(e) => {
            eprintln!("Error during sweep: {}", e);
            return;
        }
    };

    println!(
        "{:>8} {:>8} {:>7} {:>8} {:>7} {:>7} {:>7}",
        "theta", "x", "dx", "gamma", "v", "alpha", "dtheta"
    );
    for s in samples.iter().step_by(5) {
        println!(
            "{:>8.2} {:>8.2} {:>7.3} {:>8.2} {:>7.2} {:>7.2} {:>7.3}",
            s.heading, s.x, s.dx, s.gamma, s.speed, s.steering, s.dheading
        );
    }
    println!("\n{} samples collected.", samples.len());
}
