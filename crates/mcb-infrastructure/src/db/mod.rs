//! Relational Store (RS, §2): `sea-orm` entities, migrations, and
//! repository adapters for the ten tables of §6's abridged schema plus
//! the resolver's `raw_references` working queue.

pub mod entities;
pub mod migration;
pub mod pool;
pub mod repos;
