use burn::data::dataset::Dataset;

use crate::domain::example::SolveExample;

pub struct CubeDataset {
    examples: Vec<SolveExample>,
}

impl CubeDataset {
    pub fn new(examples: Vec<SolveExample>) -> Self { Self { examples } }
}

impl Dataset<SolveExample> for CubeDataset {
    fn get(&self, index: usize) -> Option<SolveExample> {
        self.examples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.examples.len()
    }
}
