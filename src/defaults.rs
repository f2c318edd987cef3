// file prefix of the electronic records of the frozen path: QM.<index>.npz
pub const ELECTRONIC_FILE_PREFIX: &str = "QM";
// file prefix of the nuclear records of the frozen path: RP.<index>.npz
pub const NUCLEAR_FILE_PREFIX: &str = "RP";
// array names inside the electronic records
pub const ENERGY_KEY: &str = "energy";
pub const FORCE_KEY: &str = "force";
pub const NACME_KEY: &str = "nacme";
// array names inside the nuclear records
pub const POSITION_KEY: &str = "pos";
pub const VELOCITY_KEY: &str = "vel";
