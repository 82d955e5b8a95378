#[macro_export]
macro_rules! impl_id_newtype {
    ($name:ty) => {
        impl $name {
            pub const fn new(raw: usize) -> Self {
                Self(raw)
            }

            pub const fn index(self) -> usize {
                self.0
            }
        }
    };
}
