//! One-time passcode generation.

use rand::Rng;
use secrecy::SecretString;

/// Smallest six-digit code.
pub const OTP_MIN: u32 = 100_000;
/// Largest six-digit code.
pub const OTP_MAX: u32 = 999_999;

/// Source of fresh passcodes.
pub trait OtpGenerator: Send + Sync {
    fn generate(&self) -> SecretString;
}

/// Uniform random codes over the full six-digit range.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomOtpGenerator;

impl OtpGenerator for RandomOtpGenerator {
    fn generate(&self) -> SecretString {
        let code = rand::thread_rng().gen_range(OTP_MIN..=OTP_MAX);
        SecretString::from(code.to_string())
    }
}

/// Always returns the same code. For tests and local demos.
#[derive(Debug, Clone)]
pub struct FixedOtpGenerator(pub String);

impl OtpGenerator for FixedOtpGenerator {
    fn generate(&self) -> SecretString {
        SecretString::from(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn random_codes_are_six_digits() {
        let generator = RandomOtpGenerator;
        for _ in 0..1_000 {
            let code = generator.generate();
            let code = code.expose_secret();
            assert_eq!(code.len(), 6, "{code} is not six characters");
            assert!(code.chars().all(|c| c.is_ascii_digit()));
            assert_ne!(&code[..1], "0");
        }
    }

    #[test]
    fn random_codes_vary() {
        let generator = RandomOtpGenerator;
        let first = generator.generate().expose_secret().to_string();
        let differs = (0..20).any(|_| generator.generate().expose_secret() != first);
        assert!(differs);
    }

    #[test]
    fn fixed_generator_repeats() {
        let generator = FixedOtpGenerator("424242".into());
        assert_eq!(generator.generate().expose_secret(), "424242");
        assert_eq!(generator.generate().expose_secret(), "424242");
    }
}
