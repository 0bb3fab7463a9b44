/// Output formatting passed explicitly to everything that prints progress.
#[derive(Debug, Clone)]
pub struct Console {
    pub prefix: String,
}

impl Default for Console {
    fn default() -> Self {
        Self {
            prefix: "  │".to_string(),
        }
    }
}

impl Console {
    pub fn line(&self, message: impl AsRef<str>) {
        println!("{} {}", self.prefix, message.as_ref());
    }

    pub fn blank(&self) {
        println!("{}", self.prefix);
    }
}
