use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use ledgercore_lib::{
    KeyPair, OutputIndex, Sha256, Transaction, TransactionId, TransactionInput, TransactionOutput,
    TransactionValidator, Utxo, UtxoPool,
};

const CHAIN_LENGTH: usize = 1_000;
const INITIAL_AMOUNT: i64 = 1_000_000;

/// Creates a pool with one UTXO and a chain of transactions where each one spends the output
/// of the previous one, paying a fee of 1.
fn create_chain(owner: &KeyPair) -> (UtxoPool, Vec<Transaction>) {
    let genesis = Utxo::new(
        TransactionId::new(Sha256::digest(b"genesis")),
        OutputIndex::new(0),
    );
    let pool = vec![(
        genesis,
        TransactionOutput::new(INITIAL_AMOUNT, owner.public_key()),
    )]
    .into_iter()
    .collect::<UtxoPool>();

    let mut transactions = Vec::with_capacity(CHAIN_LENGTH);
    let mut spent = genesis;
    let mut amount = INITIAL_AMOUNT;
    for _ in 0..CHAIN_LENGTH {
        amount -= 1;
        let inputs = vec![TransactionInput::new(
            *spent.transaction_id(),
            *spent.output_index(),
        )];
        let outputs = vec![TransactionOutput::new(amount, owner.public_key())];
        let mut transaction = Transaction::new(inputs, outputs).unwrap();
        transaction.sign_input(0, owner).unwrap();
        spent = Utxo::new(*transaction.id(), OutputIndex::new(0));
        transactions.push(transaction);
    }
    (pool, transactions)
}

fn handle_batch_benchmark(c: &mut Criterion) {
    let owner = KeyPair::from_seed([1; 32]);
    let (pool, transactions) = create_chain(&owner);

    let mut group = c.benchmark_group("Transaction validator");
    group.throughput(Throughput::Elements(CHAIN_LENGTH as u64));

    // Every transaction depends on the previous one, so the whole chain is accepted.
    group.bench_function("handle_batch for a chain of 1000 transactions", |b| {
        b.iter_batched(
            || (TransactionValidator::new(&pool), transactions.clone()),
            |(mut validator, transactions)| {
                let accepted = validator.handle_batch(transactions);
                black_box(accepted);
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(benches, handle_batch_benchmark);

criterion_main!(benches);
