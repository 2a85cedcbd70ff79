//! Integration tests for rv-model against the reference rover.

use rv_model::{
    ForceModel, ModelError, Operand, Planet, Rover, TerrainProfile, battery_energy,
    mechanical_power, motor_torque, net_force, reference_rover,
};

#[test]
fn total_mass_matches_parts() {
    let rover = reference_rover();
    let wa = &rover.wheel_assembly;
    let expected = 6.0 * (wa.wheel.mass.value + wa.speed_reducer.mass.value + wa.motor.mass.value)
        + rover.chassis_mass.value
        + rover.science_payload_mass.value
        + rover.power_subsys_mass.value;
    assert!(rover.total_mass() > 0.0);
    assert_eq!(rover.total_mass(), expected);
    assert_eq!(rover.total_mass(), 869.0);
}

#[test]
fn torque_curve_is_piecewise_linear() {
    let rover = reference_rover();
    let omegas: Vec<f64> = (0..=38).map(|i| i as f64 * 0.1).collect();
    let tau = motor_torque(&omegas, rover.motor()).unwrap().into_vec();
    for w in tau.windows(3) {
        let second_diff = w[0] - 2.0 * w[1] + w[2];
        assert!(second_diff.abs() < 1e-9);
    }
    assert_eq!(tau[0], 170.0);
    assert!(tau[38].abs() < 1e-9);
}

#[test]
fn net_force_falls_with_speed_on_a_climb() {
    let rover = reference_rover();
    let planet = Planet::mars();
    let model = ForceModel::new(&rover, &planet).unwrap();
    let speeds: Vec<f64> = (0..50).map(|i| i as f64 * 0.01).collect();
    let omegas: Vec<f64> = speeds.iter().map(|&v| model.motor_speed(v)).collect();
    let forces = net_force(&omegas, 10.0, &rover, &planet, 0.2)
        .unwrap()
        .into_vec();
    assert!(forces.windows(2).all(|w| w[1] <= w[0]));
}

#[test]
fn invalid_arguments_are_reported() {
    let rover = reference_rover();
    let planet = Planet::mars();

    let err = net_force(1.0, 76.0, &rover, &planet, 0.1).unwrap_err();
    assert!(matches!(err, ModelError::OutOfRange { .. }));

    let err = net_force(1.0, 0.0, &rover, &planet, 0.0).unwrap_err();
    assert!(matches!(err, ModelError::InvalidArg { .. }));

    let err = net_force(Operand::Scalar(f64::NAN), 0.0, &rover, &planet, 0.1).unwrap_err();
    assert!(matches!(err, ModelError::InvalidArg { .. }));
}

#[test]
fn rover_loads_from_json() {
    let rover = reference_rover();
    let text = serde_json::to_string(&rover).unwrap();
    let back: Rover = serde_json::from_str(&text).unwrap();
    assert_eq!(back, rover);

    let bad = text.replace("\"reverted\"", "\"planetary\"");
    assert!(serde_json::from_str::<Rover>(&bad).is_err());
}

#[test]
fn terrain_loads_from_json_and_validates() {
    let ok = r#"{"distance":[0.0,100.0,200.0],"angle":[1.0,2.0,0.5]}"#;
    let terrain: TerrainProfile = serde_json::from_str(ok).unwrap();
    assert!((terrain.angle_at(100.0).unwrap() - 2.0).abs() < 1e-12);

    let bad = r#"{"distance":[0.0,100.0],"angle":[1.0,2.0,0.5]}"#;
    assert!(serde_json::from_str::<TerrainProfile>(bad).is_err());
}

#[test]
fn power_and_energy_along_a_history() {
    let rover = reference_rover();
    let t = [0.0, 10.0, 20.0, 30.0];
    let v = [0.10, 0.15, 0.20, 0.25];
    let p = mechanical_power(&v, &rover).unwrap().into_vec();
    assert!(p.iter().all(|&p| p > 0.0));
    let e = battery_energy(&t, &v, &rover).unwrap();
    assert!(e > 0.0);
    // Electrical energy of six motors exceeds the mechanical energy of one.
    let mech: f64 = rv_core::trapezoid(&p, &t).unwrap();
    assert!(e > 6.0 * mech);
}
