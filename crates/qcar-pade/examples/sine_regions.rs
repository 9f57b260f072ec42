use qcar_pade::*;

fn main() {
    // y = sin(a) · b on a grid; ∂y/∂a changes sign at a = ±90°.
    let mut rows = Vec::new();
    let mut target = Vec::new();
    for a in (-180..180).step_by(10) {
        for b in 1..=5 {
            let (a, b) = (a as f64, b as f64);
            rows.push([a, b]);
            target.push(a.to_radians().sin() * b);
        }
    }

    let data = match SampleMatrix::from_rows(&rows) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("Error building samples: {}", e);
            return;
        }
    };
    println!("Estimating Q-table for {} samples...", data.nrows());

    let q = match estimate(&data, &target, 4) {
        Ok(q) => q,
        Err(e) => {
            eprintln!("Error during estimation: {}", e);
            return;
        }
    };
    let labels = match build_labels(&q, &["a", "b"]) {
        Ok(labels) => labels,
        Err(e) => {
            eprintln!("Error building labels: {}", e);
            return;
        }
    };
    let (classes, names) = enumerate_labels(&labels);

    println!("\nClasses:");
    for (id, name) in names.iter().enumerate() {
        let count = classes.iter().filter(|&&c| c == id).count();
        println!("  {:>2}: {:<12} {} samples", id, name, count);
    }

    println!("\nSigns of ∂y/∂a along b = 3:");
    for (i, row) in rows.iter().enumerate().filter(|(_, r)| r[1] == 3.0) {
        println!("  a = {:>6.1}  {:>2}", row[0], q.get(i, 0));
    }
}
