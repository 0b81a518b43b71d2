//! Everyday objects to compare rendered sizes with.

/// Describe an object whose radius is roughly `meters`.
pub fn object_size_description(meters: f64) -> &'static str {
    match meters {
        x if x >= 10.0 => "It is very large",
        x if x >= 1.0 => "It is over a meter across",
        x if x >= 0.13 => "It is the length of a bic pen with cap",
        x if x >= 0.11 => "It is the diameter of a compact disc",
        x if x >= 0.1 => "It is a decimeter",
        x if x >= 0.085 => "It is the width of a credit card",
        x if x >= 0.06 => "It is the size of a baseball",
        x if x >= 0.038 => "It is the size of a golf ball",
        x if x >= 0.033 => "It is the width of 35mm film",
        x if x >= 0.02 => "It is the average width of a human finger",
        x if x >= 0.01 => "It is the size of a large mosquito",
        x if x >= 0.001 => "It is the size of a grain of rice",
        _ => "It is the size of a pinhead or a flea",
    }
}
