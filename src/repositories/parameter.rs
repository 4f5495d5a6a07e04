//! ParameterRepository - Repository per la gestione dei parametri

use super::base::Repository;
use super::traits::Record;
use crate::entities::Parameter;

impl Record for Parameter {
    const TABLE: &'static str = "parameters";
}

pub type ParameterRepository = Repository<Parameter>;
