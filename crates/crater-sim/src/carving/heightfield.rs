use crater_core::enums::CarveOutcome;

use super::{CarveError, CarveRequest, CarveStrategy, TerrainServices};

/// Delegates to the heightfield service when one is attached.
#[derive(Debug, Default)]
pub struct HeightfieldStrategy;

impl CarveStrategy for HeightfieldStrategy {
    fn name(&self) -> &'static str {
        "heightfield"
    }

    fn carve(
        &mut self,
        terrain: &mut TerrainServices<'_>,
        request: &CarveRequest,
    ) -> Result<CarveOutcome, CarveError> {
        let service = terrain
            .heightfield
            .as_deref_mut()
            .ok_or(CarveError::ServiceUnavailable)?;
        service.carve_crater_at(request.center, request.radius)?;
        Ok(CarveOutcome::Applied)
    }
}
