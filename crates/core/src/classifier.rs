use crate::error::Result;
use crate::gateway::MetadataGateway;
use crate::models::{Inventory, Partition};
use tracing::warn;

/// Splits the inventory into photos with and without location tags.
///
/// Each side keeps inventory order. A photo whose tags cannot be read counts
/// as untagged; only fatal tool errors abort.
pub fn classify(inventory: &Inventory, gateway: &dyn MetadataGateway) -> Result<Partition> {
    let mut partition = Partition::default();
    for record in inventory {
        let tagged = match gateway.has_location_tag(&record.path) {
            Ok(tagged) => tagged,
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                warn!(path = %record.path.display(), error = %err, "could not read location tags");
                false
            }
        };
        if tagged {
            partition.tagged.push(record.clone());
        } else {
            partition.untagged.push(record.clone());
        }
    }
    Ok(partition)
}
