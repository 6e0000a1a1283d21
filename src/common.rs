/// Price of a single share.
pub type Price = f64;

/// Number of shares.
pub type Quantity = u64;
