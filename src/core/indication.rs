//! Indication instance construction.

use crate::utils::time::cim_datetime_now;
use crate::CimInstance;
use crate::CimValue;
use crate::DiffEntry;
use crate::Error;
use crate::IndicationType;
use crate::Result;

/// Build one outbound indication for a diff entry.
///
/// `SourceInstance` carries the new instance for creations and
/// modifications, the removed instance for deletions; modifications
/// additionally carry `PreviousInstance`. The instance is stamped with the
/// current CIM datetime under `time_property`.
pub(crate) fn build_indication(
    class_name: &str,
    entry: &DiffEntry,
    ty: IndicationType,
    time_property: &str,
) -> Result<CimInstance> {
    let mut indication = CimInstance::new(class_name);
    indication.set_property(time_property, CimValue::DateTime(cim_datetime_now()));

    match ty {
        IndicationType::Creation => {
            let new = require(entry.new.as_ref(), "creation entry without new instance")?;
            indication.set_property("SourceInstance", CimValue::Instance(Box::new(new.clone())));
        }
        IndicationType::Deletion => {
            let old = require(entry.old.as_ref(), "deletion entry without old instance")?;
            indication.set_property("SourceInstance", CimValue::Instance(Box::new(old.clone())));
        }
        IndicationType::Modification => {
            let new = require(entry.new.as_ref(), "modification entry without new instance")?;
            let old = require(entry.old.as_ref(), "modification entry without old instance")?;
            indication.set_property("SourceInstance", CimValue::Instance(Box::new(new.clone())));
            indication.set_property("PreviousInstance", CimValue::Instance(Box::new(old.clone())));
        }
    }

    Ok(indication)
}

fn require<'a>(
    instance: Option<&'a CimInstance>,
    message: &str,
) -> Result<&'a CimInstance> {
    instance.ok_or_else(|| Error::Fatal(message.to_string()))
}
