/// Complete Caredex API Demo
///
/// Demonstrates the registry operations end to end:
/// - Bulk CSV import with a deliberately broken row
/// - Search (numeric and free-text) with pagination metadata
/// - CRUD on a single record
/// - The dashboard statistics snapshot
/// - Role policy decisions

use std::sync::Arc;
use caredex::auth::guard::Principal;
use caredex::core::config::Config;
use caredex::core::record::{EverMarried, Gender, PatientRecord, Residence};
use caredex::service::registry::Registry;
use caredex::store::memory::MemoryStore;

const SAMPLE_CSV: &str = "\
id,gender,age,hypertension,heart_disease,ever_married,work_type,Residence_type,avg_glucose_level,bmi,smoking_status,stroke
9046,Male,67,0,1,Yes,Private,Urban,228.69,36.6,formerly smoked,1
51676,Female,61,0,0,Yes,Self-employed,Rural,202.21,N/A,never smoked,1
31112,Male,80,0,1,Yes,Private,Rural,105.92,32.5,never smoked,1
60182,Female,49,0,0,Yes,Private,Urban,171.23,34.4,smokes,1
1665,Female,oops,1,0,Yes,Self-employed,Rural,174.12,24,never smoked,1
56669,Male,81,0,0,Yes,Private,Urban,186.21,29,formerly smoked,0
";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("\n=== Caredex Patient Registry - Walkthrough ===\n");

    let store = Arc::new(MemoryStore::new());
    let registry = Registry::new(store.clone(), Config::default());
    let admin = Principal::admin(1);
    let staff = Principal::staff(2);

    // Step 1: bulk import (one row is malformed on purpose)
    println!("Step 1: IMPORT - replace-all from CSV...");
    let report = registry.import_csv(&admin, SAMPLE_CSV.as_bytes())?;
    println!("  imported {} records", report.imported);
    for failure in &report.failures {
        println!("  skipped line {}: {}", failure.line, failure.reason);
    }
    println!();

    // Step 2: search
    println!("Step 2: SEARCH");
    let view = registry.search(&admin, "9046", 1)?;
    println!("  '9046' (numeric, exact id): {} hit(s)", view.total);
    let view = registry.search(&admin, "smoked", 1)?;
    println!("  'smoked' (substring): {} hit(s)", view.total);
    let view = registry.search(&admin, "", 1)?;
    println!("  unfiltered: {} records over {} page(s)", view.total, view.total_pages);
    println!();

    // Step 3: CRUD on one record
    println!("Step 3: CREATE / UPDATE / DELETE");
    let record = PatientRecord {
        patient_id: 77777,
        gender: Gender::Other,
        age: 54.0,
        hypertension: 0,
        heart_disease: 0,
        ever_married: EverMarried::No,
        work_type: "Govt_job".to_string(),
        residence_type: Residence::Urban,
        avg_glucose_level: 88.4,
        bmi: None,
        smoking_status: Some("never smoked".to_string()),
        stroke: 0,
    };
    let id = registry.create(&admin, record.clone())?;
    println!("  created {}", id);

    let mut updated = record;
    updated.age = 55.0;
    registry.update(&admin, &id, updated)?;
    let stored = registry.get(&admin, &id)?;
    println!("  updated, age is now {}", stored.record.age);

    registry.delete(&admin, &id)?;
    println!("  deleted {}", id);
    println!();

    // Step 4: dashboard snapshot
    println!("Step 4: STATS");
    let snapshot = registry.stats(&admin)?;
    println!("  total = {}", snapshot.total);
    println!(
        "  stroke: {} yes / {} no ({}%)",
        snapshot.stroke_yes, snapshot.stroke_no, snapshot.stroke_rate
    );
    println!("  gender counts (M/F/O) = {:?}", snapshot.gender_counts);
    println!("  age bands = {:?}", snapshot.age_band_counts);
    println!(
        "  avg age = {:?}, avg glucose = {:?}, avg bmi = {:?}",
        snapshot.avg_age, snapshot.avg_glucose, snapshot.avg_bmi
    );
    println!("  high risk ({}):", snapshot.high_risk.len());
    for entry in &snapshot.high_risk {
        println!(
            "    patient {} glucose {}",
            entry.record.patient_id, entry.record.avg_glucose_level
        );
    }
    println!();

    // Step 5: role policy
    println!("Step 5: AUTHORIZATION");
    match registry.delete(&staff, &id) {
        Ok(_) => println!("  staff delete unexpectedly allowed"),
        Err(e) => println!("  staff delete rejected: {}", e),
    }
    let decision = registry.authorize_role_change(&admin, 1);
    println!("  admin demoting themselves: {:?}", decision);
    println!();

    // Step 6: persistence
    println!("Step 6: SNAPSHOT");
    let path = std::env::temp_dir().join("caredex-demo.json");
    store.save(&path)?;
    println!("  collection saved to {}", path.display());

    println!("\nDone.");
    Ok(())
}
