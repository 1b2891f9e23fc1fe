use super::*;

const ALL_VARS: &[&str] = &[
    "LAYOUT_POOL_HEADER_WIDTH",
    "LAYOUT_PADDING_X",
    "LAYOUT_PADDING_Y",
    "LAYOUT_NODE_V_SPACING",
    "LAYOUT_COLUMN_H_SPACING",
    "LAYOUT_MIN_LANE_HEIGHT",
    "LAYOUT_COLUMN_THRESHOLD",
    "LAYOUT_MOVE_EPSILON",
    "LEARN_COLUMN_THRESHOLD",
    "LEARN_DEFAULT_H_SPACING",
    "LEARN_DEFAULT_V_PADDING",
    "LEARN_DEBOUNCE_MS",
];

/// Env mutation is process-global; every test touching it holds this lock.
static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// # Safety
/// Callers must hold `ENV_LOCK`.
unsafe fn clear_env() {
    for var in ALL_VARS {
        unsafe { std::env::remove_var(var) };
    }
}

#[test]
fn defaults_match_generator_guidance() {
    let cfg = SwimlaneConfig::default();
    assert!((cfg.layout.column_h_spacing - 450.0).abs() < f64::EPSILON);
    assert!((cfg.layout.node_v_spacing - 200.0).abs() < f64::EPSILON);
    assert!((cfg.layout.padding_y - 180.0).abs() < f64::EPSILON);
    assert!((cfg.layout.column_threshold - 75.0).abs() < f64::EPSILON);
    assert!((cfg.learner.column_threshold - 40.0).abs() < f64::EPSILON);
    assert_eq!(cfg.learner.debounce, Duration::from_secs(2));
    assert!(cfg.validate().is_ok());
}

#[test]
fn from_env_without_overrides_is_default() {
    let _guard = ENV_LOCK.lock().unwrap();
    unsafe { clear_env() };

    let cfg = SwimlaneConfig::from_env().unwrap();
    assert_eq!(cfg, SwimlaneConfig::default());
}

#[test]
fn from_env_reads_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    unsafe {
        clear_env();
        std::env::set_var("LAYOUT_COLUMN_H_SPACING", "500");
        std::env::set_var("LAYOUT_PADDING_Y", " 90 ");
        std::env::set_var("LEARN_DEBOUNCE_MS", "250");
    }

    let cfg = SwimlaneConfig::from_env().unwrap();
    assert!((cfg.layout.column_h_spacing - 500.0).abs() < f64::EPSILON);
    assert!((cfg.layout.padding_y - 90.0).abs() < f64::EPSILON);
    assert_eq!(cfg.learner.debounce, Duration::from_millis(250));

    unsafe { clear_env() };
}

#[test]
fn from_env_ignores_unparsable_values() {
    let _guard = ENV_LOCK.lock().unwrap();
    unsafe {
        clear_env();
        std::env::set_var("LAYOUT_PADDING_X", "wide");
    }

    let cfg = LayoutConfig::from_env();
    assert!((cfg.padding_x - DEFAULT_PADDING_X).abs() < f64::EPSILON);

    unsafe { clear_env() };
}

#[test]
fn from_env_rejects_negative_spacing() {
    let _guard = ENV_LOCK.lock().unwrap();
    unsafe {
        clear_env();
        std::env::set_var("LAYOUT_NODE_V_SPACING", "-10");
    }

    let err = SwimlaneConfig::from_env().unwrap_err();
    assert!(matches!(err, ConfigError::NotPositive { key: "node_v_spacing", .. }));
    assert_eq!(err.error_code(), "E_CONFIG_NOT_POSITIVE");

    unsafe { clear_env() };
}

#[test]
fn validate_rejects_threshold_wider_than_spacing() {
    let mut cfg = SwimlaneConfig::default();
    cfg.layout.column_threshold = 500.0;
    let err = cfg.validate().unwrap_err();
    assert!(matches!(err, ConfigError::ThresholdTooWide { .. }));
    assert!(!err.retryable());
}

#[test]
fn validate_rejects_nan() {
    let mut cfg = SwimlaneConfig::default();
    cfg.learner.default_v_padding = f64::NAN;
    assert!(matches!(cfg.validate(), Err(ConfigError::NotPositive { key: "default_v_padding", .. })));
}
