/// Exposes the underlying secret value of a wrapper type.
pub trait Raw {
    fn raw(&self) -> &str;
}

/// Masked representation of a secret, safe to put into logs.
pub trait Redact: Raw {
    fn redact(&self) -> String {
        let raw = self.raw();
        let visible = raw.chars().take(4).collect::<String>();
        if raw.chars().count() <= 4 {
            return "****".to_string();
        }
        format!("{visible}****")
    }
}
