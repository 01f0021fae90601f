use burn::{
    nn::{
        loss::CrossEntropyLossConfig,
        Embedding, EmbeddingConfig,
        Linear, LinearConfig,
        Lstm, LstmConfig, LstmState,
    },
    prelude::*,
    tensor::activation::softmax,
};

// #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct CubeSolverConfig {
    pub sticker_vocab: usize,
    pub move_vocab:    usize,
    #[config(default = 128)]
    pub embed_dim:     usize,
    #[config(default = 512)]
    pub hidden_dim:    usize,
}

impl CubeSolverConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> CubeSolverModel<B> {
        CubeSolverModel {
            encoder: self.init_encoder(device),
            decoder: self.init_decoder(device),
        }
    }

    pub fn init_encoder<B: Backend>(&self, device: &B::Device) -> Encoder<B> {
        let embedding = EmbeddingConfig::new(self.sticker_vocab, self.embed_dim).init(device);
        let lstm      = LstmConfig::new(self.embed_dim, self.hidden_dim, true).init(device);
        Encoder { embedding, lstm }
    }

    pub fn init_decoder<B: Backend>(&self, device: &B::Device) -> Decoder<B> {
        let embedding = EmbeddingConfig::new(self.move_vocab, self.embed_dim).init(device);
        let lstm      = LstmConfig::new(self.embed_dim, self.hidden_dim, true).init(device);
        let output    = LinearConfig::new(self.hidden_dim, self.move_vocab).init(device);
        Decoder { embedding, lstm, output }
    }
}

/// Sticker tokens → final (hidden, cell) state.
#[derive(Module, Debug)]
pub struct Encoder<B: Backend> {
    pub embedding: Embedding<B>,
    pub lstm:      Lstm<B>,
}

impl<B: Backend> Encoder<B> {
    /// stickers: [batch, 54] → state with hidden, cell: [batch, hidden_dim]
    pub fn forward(&self, stickers: Tensor<B, 2, Int>) -> LstmState<B, 2> {
        let x = self.embedding.forward(stickers);
        let (_, state) = self.lstm.forward(x, None);
        state
    }
}

/// Move tokens + initial state → per-timestep move logits.
#[derive(Module, Debug)]
pub struct Decoder<B: Backend> {
    pub embedding: Embedding<B>,
    pub lstm:      Lstm<B>,
    pub output:    Linear<B>,
}

impl<B: Backend> Decoder<B> {
    /// moves: [batch, steps] → logits [batch, steps, move_vocab], final state
    pub fn forward(
        &self,
        moves: Tensor<B, 2, Int>,
        state: LstmState<B, 2>,
    ) -> (Tensor<B, 3>, LstmState<B, 2>) {
        let x = self.embedding.forward(moves);
        let (hidden_seq, state) = self.lstm.forward(x, Some(state));
        // Linear acts on the last dim, i.e. time-distributed
        (self.output.forward(hidden_seq), state)
    }

    /// Same as forward, softmaxed over the move vocabulary.
    pub fn forward_probs(
        &self,
        moves: Tensor<B, 2, Int>,
        state: LstmState<B, 2>,
    ) -> (Tensor<B, 3>, LstmState<B, 2>) {
        let (logits, state) = self.forward(moves, state);
        (softmax(logits, 2), state)
    }
}

/// Encoder and decoder wired together for teacher-forced training.
#[derive(Module, Debug)]
pub struct CubeSolverModel<B: Backend> {
    pub encoder: Encoder<B>,
    pub decoder: Decoder<B>,
}

impl<B: Backend> CubeSolverModel<B> {
    /// encoder_input: [batch, 54], decoder_input: [batch, steps]
    /// → logits [batch, steps, move_vocab]
    pub fn forward(
        &self,
        encoder_input: Tensor<B, 2, Int>,
        decoder_input: Tensor<B, 2, Int>,
    ) -> Tensor<B, 3> {
        let state = self.encoder.forward(encoder_input);
        let (logits, _) = self.decoder.forward(decoder_input, state);
        logits
    }

    pub fn forward_loss(
        &self,
        encoder_input: Tensor<B, 2, Int>,
        decoder_input: Tensor<B, 2, Int>,
        targets:       Tensor<B, 2, Int>,
    ) -> (Tensor<B, 1>, Tensor<B, 3>) {
        let logits = self.forward(encoder_input, decoder_input);
        let loss   = sequence_loss(logits.clone(), targets);
        (loss, logits)
    }
}

/// Mean cross-entropy over every (example, timestep) pair.
pub fn sequence_loss<B: Backend>(logits: Tensor<B, 3>, targets: Tensor<B, 2, Int>) -> Tensor<B, 1> {
    let [batch, steps, vocab] = logits.dims();
    let ce = CrossEntropyLossConfig::new().init(&logits.device());
    ce.forward(
        logits.reshape([batch * steps, vocab]),
        targets.reshape([batch * steps]),
    )
}

/// (correct, total) timestep predictions, argmax against targets.
pub fn token_accuracy<B: Backend>(logits: Tensor<B, 3>, targets: Tensor<B, 2, Int>) -> (usize, usize) {
    let [batch, steps, _] = logits.dims();
    let predicted = logits.argmax(2).reshape([batch, steps]);
    let correct: i64 = predicted
        .equal(targets)
        .int()
        .sum()
        .into_scalar()
        .elem::<i64>();
    (correct as usize, batch * steps)
}
