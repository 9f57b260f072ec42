use qcar_kinematics::*;

fn main() {
    let mut car = Car::new(Pose::new(0.0, 0.0, 0.0));
    car.set_steering(30.0);
    car.set_speed(50.0);
    let dt = 1.0 / 50.0; // Time step in seconds
    let num_steps = 50;

    println!("Initializing simulation...");
    println!("  Initial State:");
    println!("    {}", car);
    println!("  Simulation Settings:");
    println!("    Time Step:    {} s", dt);
    println!("    Num Steps:    {}", num_steps);
    println!("\nSimulating...");

    for i in 0..num_steps {
        if let Err(e) = car.drive(0.0, dt) {
            eprintln!("Error during simulation step {}: {}", i + 1, e);
            break;
        }
        match car.turning_center() {
            Some(center) => println!(
                "Step {:>2}: Pose: {}  centre: {}  r: {:.2}",
                i + 1,
                car.pose(),
                center,
                car.body_turning_radius()
            ),
            None => println!("Step {:>2}: Pose: {}", i + 1, car.pose()),
        }
    }

    println!("\nSimulation complete.");
    println!("Final: {}", car);
}
