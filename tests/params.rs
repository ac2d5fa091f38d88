use curl_particles::error::ParticleError;
use curl_particles::particles::params::{Parameter, ParticleParameters};

#[test]
fn defaults_match_the_descriptors() {
    let parameters = ParticleParameters::default();
    for parameter in Parameter::ALL {
        let descriptor = parameter.descriptor();
        assert_eq!(parameters.get(parameter), descriptor.default);
        assert!(descriptor.contains(descriptor.default), "{} default outside range", descriptor.name);
    }
    assert_eq!(parameters.noise_scale(), 0.05);
    assert_eq!(parameters.noise_time(), 0.1);
    assert_eq!(parameters.age_limit(), 5.0);
    assert_eq!(parameters.alpha(), 0.4);
    assert_eq!(parameters.range(), 10.0);
}

#[test]
fn declared_ranges() {
    let ranges: Vec<_> = Parameter::ALL
        .iter()
        .map(|p| (p.descriptor().name, p.descriptor().min, p.descriptor().max))
        .collect();
    assert_eq!(
        ranges,
        vec![
            ("noise_scale", 0.01, 0.25),
            ("noise_time", 0.01, 1.0),
            ("age_limit", 0.1, 20.0),
            ("alpha", 0.01, 1.0),
            ("range", 1.0, 100.0),
        ]
    );
}

#[test]
fn strict_setter_rejects_out_of_range_and_keeps_the_old_value() {
    let mut parameters = ParticleParameters::default();

    let err = parameters.set(Parameter::AgeLimit, 25.0).unwrap_err();
    assert!(matches!(err, ParticleError::ParameterOutOfRange { name: "age_limit", .. }));
    assert_eq!(parameters.age_limit(), 5.0);

    assert!(parameters.set(Parameter::Alpha, f32::NAN).is_err());
    assert!(parameters.set(Parameter::Range, f32::INFINITY).is_err());
    assert_eq!(parameters.alpha(), 0.4);
}

#[test]
fn strict_setter_accepts_bounds() {
    let mut parameters = ParticleParameters::default();
    parameters.set(Parameter::NoiseScale, 0.25).unwrap();
    parameters.set(Parameter::NoiseTime, 0.01).unwrap();
    assert_eq!(parameters.noise_scale(), 0.25);
    assert_eq!(parameters.noise_time(), 0.01);
}

#[test]
fn clamping_setter_clamps_finite_values() {
    let mut parameters = ParticleParameters::default();

    assert_eq!(parameters.set_clamped(Parameter::Range, 1000.0).unwrap(), 100.0);
    assert_eq!(parameters.range(), 100.0);
    assert_eq!(parameters.set_clamped(Parameter::Alpha, -3.0).unwrap(), 0.01);
    assert!(parameters.set_clamped(Parameter::Alpha, f32::NAN).is_err());
    assert_eq!(parameters.alpha(), 0.01);
}

#[test]
fn lookup_by_name() {
    assert_eq!(Parameter::from_name("noise_time"), Some(Parameter::NoiseTime));
    assert_eq!(Parameter::from_name("gravity"), None);
}

#[test]
fn precision_gives_the_editor_step() {
    assert!((Parameter::NoiseScale.descriptor().step() - 0.001).abs() < 1e-9);
    assert!((Parameter::Range.descriptor().step() - 0.1).abs() < 1e-7);
}

#[test]
fn deserialized_values_are_checked_by_validate() {
    let parameters: ParticleParameters = serde_json::from_str(r#"{ "alpha": 3.0 }"#).unwrap();
    assert_eq!(parameters.noise_scale(), 0.05);
    assert!(matches!(
        parameters.validate(),
        Err(ParticleError::ParameterOutOfRange { name: "alpha", .. })
    ));

    let parameters: ParticleParameters = serde_json::from_str(r#"{ "range": 50.0 }"#).unwrap();
    parameters.validate().unwrap();
    assert_eq!(parameters.range(), 50.0);
}
